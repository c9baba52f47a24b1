pub mod cleanup_streams;
