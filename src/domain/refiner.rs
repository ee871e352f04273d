pub mod cleanup;
pub mod clustering;
pub mod create_dir;
pub mod data_reuse;
pub mod horizontal_clustering;
pub mod label_clustering;
pub mod transfer;
