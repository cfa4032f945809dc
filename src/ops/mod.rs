pub mod auth_flow;
pub mod controller;
pub mod reorder;
pub mod task_list;
pub mod task_ops;
