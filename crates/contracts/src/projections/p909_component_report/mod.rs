pub mod dto;
pub mod export;
pub mod filter;
pub mod layout;
pub mod row;
pub mod selection;
pub mod state;

pub use dto::{
    ComponentFilterResponse, MasterDataCatalog, MasterDataPayload, MasterDataResponse, SkuOption,
};
pub use export::{prepare_export, ApprovalHandoff, ExportPlan, ReportDocument};
pub use filter::{ComponentQuery, FilterCriteria};
pub use row::{DisplayRow, RowType};
pub use state::{ReportModal, ReportState, RequestToken};
