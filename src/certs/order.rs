//! Chain order detection and recommended ordering.

use log::debug;

use super::classify::{classify, ChainPosition};
use super::model::Certificate;

/// Whether any adjacent pair of certificates is out of order.
///
/// A pair is ordered when the first certificate's issuer is the second's subject. A
/// two element chain of a leaf followed by an unrelated root is incomplete rather than
/// misordered and is not flagged here.
pub fn has_misordered_certs(chain: &[Certificate]) -> bool {
    chain.windows(2).enumerate().any(|(i, pair)| {
        if pair[0].issuer() == pair[1].subject() {
            return false;
        }
        let leaf_to_root = chain.len() == 2
            && i == 0
            && classify(&pair[1], chain) == ChainPosition::Root;
        !leaf_to_root
    })
}

/// Whether `cert` starts the chain when it is reordered.
///
/// Version 1 and 2 certificates are classified by position, which says nothing about
/// a misordered chain, so for them the leaf is the certificate that issued no other
/// member of the chain.
fn starts_chain(cert: &Certificate, chain: &[Certificate]) -> bool {
    if cert.version() < 3 {
        return !chain
            .iter()
            .any(|other| other != cert && other.issuer() == cert.subject());
    }
    classify(cert, chain).is_leaf()
}

/// Returns the chain reordered leaf first, each certificate followed by its issuer.
///
/// Certificates that cannot be placed are appended in their original order. When the
/// chain has no unique leaf, or a level has more than one candidate issuer, the
/// original order is returned unchanged.
pub fn order_cert_chain(chain: &[Certificate]) -> Vec<Certificate> {
    let leaves: Vec<usize> = chain
        .iter()
        .enumerate()
        .filter(|(_, cert)| starts_chain(cert, chain))
        .map(|(i, _)| i)
        .collect();

    let [leaf] = leaves.as_slice() else {
        debug!("No unique leaf among {} cert(s), keeping original order", chain.len());
        return chain.to_vec();
    };

    let mut used = vec![false; chain.len()];
    let mut order = vec![*leaf];
    used[*leaf] = true;

    let mut current = *leaf;
    loop {
        let candidates: Vec<usize> = chain
            .iter()
            .enumerate()
            .filter(|(i, cert)| !used[*i] && cert.subject() == chain[current].issuer())
            .map(|(i, _)| i)
            .collect();

        match candidates.as_slice() {
            [] => {
                let cycles_back = order
                    .iter()
                    .any(|&i| i != current && chain[i].subject() == chain[current].issuer());
                if cycles_back {
                    debug!("Issuer cycle detected, keeping original order");
                    return chain.to_vec();
                }
                break;
            }
            [next] => {
                used[*next] = true;
                order.push(*next);
                current = *next;
            }
            _ => {
                debug!("Multiple issuer candidates for {}, keeping original order", chain[current].subject());
                return chain.to_vec();
            }
        }
    }

    order.extend((0..chain.len()).filter(|i| !used[*i]));
    order.into_iter().map(|i| chain[i].clone()).collect()
}
