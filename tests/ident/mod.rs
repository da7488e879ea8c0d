mod adversarial;
mod determinism;
mod precedence;
mod refiners;
