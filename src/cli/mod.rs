mod auth;
mod commands;
pub mod credentials;
pub mod drafts;
pub mod http_client;
mod record;
mod report;
mod section;
mod shift;
mod user;

pub use auth::{run_auth_login, run_auth_logout};
pub use commands::{
    AuthCommands, RecordCommands, ReportArgs, SectionCommands, ShiftCommands, UserCommands,
};
pub use record::{run_record_list, run_record_show, run_record_submit};
pub use report::run_report;
pub use section::{run_section_create, run_section_delete, run_section_list, run_section_rename};
pub use shift::{run_shift_create, run_shift_delete, run_shift_list, run_shift_update};
pub use user::{run_user_create, run_user_delete, run_user_list, run_user_update};
