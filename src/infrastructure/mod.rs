pub mod in_memory;
pub mod mock_gateway;

#[cfg(feature = "gateway-http")]
pub mod http;

#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
