// Known machines
//
// Only consulted when the machine comes from CIME_MACHINE; an explicit
// machine argument bypasses this table entirely.

use scream_ctest_core::port::MachineSupport;

/// One supported machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSpec {
    pub name: String,
    pub description: String,
}

const BUILTIN_MACHINES: &[(&str, &str)] = &[
    ("mappy", "SNL workstation"),
    ("weaver", "SNL GPU testbed (V100)"),
    ("blake", "SNL Skylake cluster"),
    ("lassen", "LLNL Power9 + V100"),
    ("ruby", "LLNL Intel cluster"),
    ("dane", "LLNL Sapphire Rapids cluster"),
    ("quartz", "LLNL Intel cluster"),
    ("syrah", "LLNL Intel cluster"),
    ("summit", "OLCF Power9 + V100"),
    ("ascent", "OLCF Summit training system"),
    ("compy", "PNNL Intel cluster"),
    ("chrysalis", "ANL AMD cluster"),
    ("anlgce", "ANL GCE workstation"),
    ("pm-cpu", "NERSC Perlmutter CPU nodes"),
    ("pm-gpu", "NERSC Perlmutter GPU nodes"),
    ("frontier", "OLCF AMD MI250X"),
    ("linux-generic", "Generic Linux box"),
    ("linux-generic-debug", "Generic Linux box, debug build"),
    ("linux-generic-serial", "Generic Linux box, no MPI"),
];

/// Table of supported machines. Lookup is exact and case-sensitive
#[derive(Debug, Clone)]
pub struct MachineSpecs {
    machines: Vec<MachineSpec>,
}

impl MachineSpecs {
    /// The machines the scripts tests are known to run on
    pub fn builtin() -> Self {
        Self {
            machines: BUILTIN_MACHINES
                .iter()
                .map(|(name, description)| MachineSpec {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    /// Add (or redescribe) a machine
    pub fn with_machine(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let description = description.into();
        match self.machines.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.description = description,
            None => self.machines.push(MachineSpec { name, description }),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&MachineSpec> {
        self.machines.iter().find(|m| m.name == name)
    }

    pub fn machines(&self) -> &[MachineSpec] {
        &self.machines
    }
}

impl Default for MachineSpecs {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MachineSupport for MachineSpecs {
    fn is_supported(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let specs = MachineSpecs::builtin();
        assert!(specs.is_supported("mappy"));
        assert!(specs.is_supported("pm-gpu"));
        assert!(!specs.is_supported("Mappy"));
        assert!(!specs.is_supported(""));
        assert!(!specs.is_supported("my-laptop"));
    }

    #[test]
    fn test_with_machine() {
        let specs = MachineSpecs::builtin()
            .with_machine("my-laptop", "dev box")
            .with_machine("mappy", "renamed");

        assert!(specs.is_supported("my-laptop"));
        assert_eq!(specs.get("mappy").unwrap().description, "renamed");
        assert_eq!(
            specs.machines().iter().filter(|m| m.name == "mappy").count(),
            1
        );
    }
}
