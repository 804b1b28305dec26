//! Generic execution of data-access specs against PostgreSQL.

mod crud;

pub use crud::QueryInterpreter;
