pub mod dividend;
