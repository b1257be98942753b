pub(crate) mod context;
pub(crate) mod manager;
pub(crate) mod method;
pub(crate) mod object;
#[allow(clippy::module_inception)]
pub(crate) mod pool;
pub(crate) mod settings;
