// Scan request files and config overrides
pub mod scan_request;

// Re-export commonly used types
pub use scan_request::{
    ScanRequest, SymbolInput, TimeframeInput, load_config, load_scan_request, save_scan_request,
};
