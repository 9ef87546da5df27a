pub mod imc;
