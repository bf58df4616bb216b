//! Control policies — pure logic, zero I/O.

pub mod valve;
