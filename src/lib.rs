pub mod stratus;
