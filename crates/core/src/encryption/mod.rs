pub mod encryptor;
pub mod session_key;
