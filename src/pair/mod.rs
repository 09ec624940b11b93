pub mod oracle;
pub mod pair;
pub mod position;
pub mod swap;
pub mod tick;

#[cfg(test)]
pub(crate) mod harness;
