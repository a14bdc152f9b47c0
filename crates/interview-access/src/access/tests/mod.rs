mod common;
mod decision;
mod service;
