pub mod proxy;

pub use proxy::ProxyModel;
