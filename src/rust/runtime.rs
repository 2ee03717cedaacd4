use std::io;

use tokio::runtime::{Builder, Runtime};

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub worker_threads: usize, // 0 lets tokio decide
}

pub fn create_runtime(config: &RuntimeConfig) -> io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all().thread_name("upi-sms-worker");

    if config.worker_threads > 0 {
        builder.worker_threads(config.worker_threads);
    }

    builder.build()
}
