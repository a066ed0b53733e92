mod credentials_tests;
mod gate_tests;
