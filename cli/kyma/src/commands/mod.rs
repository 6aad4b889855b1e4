pub mod connectivity;
pub mod function;
