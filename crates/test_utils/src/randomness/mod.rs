//! Deterministic randomness for reproducible tests

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use waypoint_types::app::{Address, ProxyEdge, ProxyKind};

/// Deterministic random number generator for tests
pub struct TestRng {
    rng: StdRng,
}

impl TestRng {
    /// A generator seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A generator seeded with 12345
    pub fn with_default_seed() -> Self {
        Self::new(12345)
    }

    /// A random address
    pub fn address(&mut self) -> Address {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        Address(bytes)
    }

    /// A random delegation graph over `nodes` distinct addresses with `edges`
    /// edges. Self-loops and cycles are allowed; the resolver must cope.
    pub fn proxy_graph(&mut self, nodes: usize, edges: usize) -> (Vec<Address>, Vec<ProxyEdge>) {
        let addresses: Vec<Address> = (0..nodes.max(1)).map(|_| self.address()).collect();
        let mut out = Vec::with_capacity(edges);
        for _ in 0..edges {
            let delegator = addresses.choose(&mut self.rng).copied();
            let delegatee = addresses.choose(&mut self.rng).copied();
            if let (Some(delegator), Some(delegatee)) = (delegator, delegatee) {
                out.push(ProxyEdge::new(delegator, delegatee, ProxyKind::Any));
            }
        }
        (addresses, out)
    }

}

impl Default for TestRng {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_graph() {
        assert_ne!(TestRng::new(1).address(), TestRng::new(2).address());
        let a = TestRng::new(7).proxy_graph(5, 12);
        let b = TestRng::new(7).proxy_graph(5, 12);
        assert_eq!(a, b);
    }
}
