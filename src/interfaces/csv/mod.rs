pub mod product_reader;
pub mod purchase_writer;
