//! List built-in learners

use crate::error::Result;
use nelly::learner::LearnerRegistry;

pub(crate) fn run(json: bool) -> Result<()> {
    let registry = LearnerRegistry::with_builtins();
    let names: Vec<&str> = registry.names().collect();
    if json {
        println!("{}", serde_json::to_string(&names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}
