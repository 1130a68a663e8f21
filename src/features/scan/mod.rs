// レシートスキャン機能モジュール

pub mod handlers;
pub mod models;
pub mod provider;
pub mod server;
pub mod service;


pub use handlers::{JsonReply, ScanHandlers};
pub use models::{parse_data_url, to_data_url, DecodedImage, ScanFields, ScanJobStatus};
pub use provider::{ProviderClient, ProviderReply};
pub use server::ScanProxyServer;
pub use service::{normalize_scan_amount, normalize_scan_date, ScanService};
