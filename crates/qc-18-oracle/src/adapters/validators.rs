use crate::ports::outbound::ValidatorSetProvider;
use shared_types::{Address, Validator};

/// Fixed validator set, for genesis tooling and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticValidatorSet {
    validators: Vec<Validator>,
}

impl StaticValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// Mark `address` as jailed; it stays in the set but cannot be sampled.
    pub fn deactivate(&mut self, address: &Address) {
        for validator in self.validators.iter_mut().filter(|v| &v.address == address) {
            validator.active = false;
        }
    }

    /// Replace the power of `address`, adding it if absent.
    pub fn set_power(&mut self, address: Address, power: u64) {
        match self.validators.iter_mut().find(|v| v.address == address) {
            Some(validator) => validator.power = power,
            None => self.validators.push(Validator::new(address, power)),
        }
    }
}

impl ValidatorSetProvider for StaticValidatorSet {
    fn validators(&self) -> Vec<Validator> {
        self.validators.clone()
    }
}
