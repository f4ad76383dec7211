pub mod agree;
pub mod completions;
pub mod derive;
pub mod digest;
pub mod keygen;
pub mod password;
pub mod sign;
pub mod symmetric;
pub mod version;
