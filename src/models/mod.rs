pub mod architecture;

pub use architecture::Architecture;
