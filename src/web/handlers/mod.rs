// Route handlers, one module per API resource.

pub mod analyze;
