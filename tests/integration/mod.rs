mod common;
mod pipeline_test;
mod protocol_test;
