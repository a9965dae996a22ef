pub mod clock;
pub mod gen_id;
pub mod signature;
