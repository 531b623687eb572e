pub mod csv_decode;
pub mod csv_import_routine;
pub mod destination_locks;
