pub mod persistence;
pub mod solana;
