pub mod fundamentus;
