use std::thread;
use tracing::info;

// Logs which worker thread picked the request up
pub fn thread_logging(str: &str) {
    let thread_id = thread::current().id();
    info!("{}: {:?}", str, thread_id);
}
