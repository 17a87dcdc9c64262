// Integration tests for the worker units, coordinators and deadline wrapper.

mod fixtures;
mod test_synchronous;
