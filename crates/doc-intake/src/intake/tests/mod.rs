mod common;

mod download;
