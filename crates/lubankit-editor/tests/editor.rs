#[path = "editor/draw.rs"]
mod draw;
#[path = "editor/flows.rs"]
mod flows;
#[path = "editor/tasks.rs"]
mod tasks;
