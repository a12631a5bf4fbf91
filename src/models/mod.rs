pub mod task;

pub use task::{
    to_list_response, Metadata, Task, TaskListResponse, TaskRequest, TaskResponse, DATE_FORMAT,
    MAX_SUMMARY_CHARS,
};
