pub mod csv_export_routine;
