mod record;
mod run;
#[cfg(test)]
mod tests;
mod xml;

pub use run::run;
