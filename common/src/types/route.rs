//! Trade routes and their byte encodings
//!
//! A route is an ordered sequence of `(fee, asset)` hops starting from an
//! input asset. On the wire a route is the concatenation
//! `asset, fee, asset, fee, ..., asset` of fixed-width fields.
//!
//! The router reads exact-input routes in execution order and exact-output
//! routes backwards from the desired output asset. The two encodings are kept
//! as distinct types, [`ForwardRoute`] and [`ReverseRoute`], so that one cannot
//! be handed to an entrypoint expecting the other.

use std::{fmt::Display, str::FromStr};

use alloy_primitives::{Address, Bytes};
use constants::{ASSET_WIDTH, FEE_WIDTH, HOP_WIDTH};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{AssetId, fee::FeeTier};

/// The separator between fields in a route's string representation
const ROUTE_STR_SEPARATOR: char = ':';

/// Errors constructing, encoding, or decoding a route
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The encoded route has a length that is not `20 * (n + 1) + 3 * n`
    #[error("invalid encoded route length: {0}")]
    InvalidLength(usize),
    /// A route must contain at least one hop
    #[error("route has no hops")]
    NoHops,
    /// A fee tier does not fit in 24 bits
    #[error("fee tier out of range: {0}")]
    FeeTierOutOfRange(u32),
    /// A fee tier could not be parsed
    #[error("invalid fee tier: {0}")]
    InvalidFeeTier(String),
    /// An asset identifier could not be parsed
    #[error("invalid asset: {0}")]
    InvalidAsset(String),
    /// A route string is not of the form `asset:fee:asset[:fee:asset...]`
    #[error("invalid route format: {0}")]
    InvalidFormat(String),
    /// A hop trades an asset for itself
    #[error("hop trades {0} for itself")]
    SameAssetHop(Address),
}

/// A single hop in a route: the fee tier of the pool traded through and the
/// asset received from it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hop {
    /// The fee tier of the pool
    pub fee: FeeTier,
    /// The asset this hop yields
    pub asset: AssetId,
}

impl Hop {
    /// Constructor
    pub fn new(fee: FeeTier, asset: AssetId) -> Self {
        Self { fee, asset }
    }
}

/// A route in execution order
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// The asset the first hop consumes
    input: AssetId,
    /// The hops, in the order they execute
    hops: Vec<Hop>,
}

impl Route {
    /// Construct a route, validating that it is non-empty and that no hop
    /// trades an asset for itself
    pub fn new(input: AssetId, hops: Vec<Hop>) -> Result<Self, RouteError> {
        if hops.is_empty() {
            return Err(RouteError::NoHops);
        }

        let mut prev = input;
        for hop in hops.iter() {
            if hop.asset == prev {
                return Err(RouteError::SameAssetHop(prev));
            }
            prev = hop.asset;
        }

        Ok(Self { input, hops })
    }

    /// Construct a single-hop route
    pub fn single(input: AssetId, fee: FeeTier, output: AssetId) -> Result<Self, RouteError> {
        Self::new(input, vec![Hop::new(fee, output)])
    }

    /// The asset the route consumes
    pub fn input_asset(&self) -> AssetId {
        self.input
    }

    /// The asset the route yields
    pub fn output_asset(&self) -> AssetId {
        // `new` guarantees at least one hop
        self.hops.last().map(|hop| hop.asset).unwrap_or(self.input)
    }

    /// The hops of the route
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// The number of pools the route trades through
    pub fn num_hops(&self) -> usize {
        self.hops.len()
    }

    /// All assets touched by the route, in order
    pub fn assets(&self) -> impl Iterator<Item = AssetId> + '_ {
        std::iter::once(self.input).chain(self.hops.iter().map(|hop| hop.asset))
    }

    /// The `(asset_in, fee, asset_out)` pool triple of each hop, in order
    pub fn pools(&self) -> impl Iterator<Item = (AssetId, FeeTier, AssetId)> + '_ {
        self.assets().tuple_windows().zip(self.hops.iter()).map(|((a, b), hop)| (a, hop.fee, b))
    }

    /// The same pools traversed from the output back to the input
    pub fn reversed(&self) -> Self {
        let mut assets = self.assets().collect_vec();
        assets.reverse();
        let fees = self.hops.iter().rev().map(|hop| hop.fee);

        let input = assets[0];
        let hops = fees.zip(assets.into_iter().skip(1)).map(|(fee, asset)| Hop::new(fee, asset));
        Self { input, hops: hops.collect() }
    }

    /// Encode the route for an exact-input trade
    pub fn forward(&self) -> ForwardRoute {
        ForwardRoute(encode_path(self))
    }

    /// Encode the route for an exact-output trade
    pub fn reverse(&self) -> ReverseRoute {
        ReverseRoute(encode_path(&self.reversed()))
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.input)?;
        for hop in self.hops.iter() {
            write!(f, " -[{}]-> {}", hop.fee, hop.asset)?;
        }
        Ok(())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    /// Parse a route of the form `asset:fee:asset[:fee:asset...]`, in
    /// execution order
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(ROUTE_STR_SEPARATOR).map(str::trim).collect_vec();
        if parts.len() < 3 || parts.len() % 2 == 0 {
            return Err(RouteError::InvalidFormat(s.to_string()));
        }

        let parse_asset =
            |a: &str| Address::from_str(a).map_err(|_| RouteError::InvalidAsset(a.to_string()));
        let input = parse_asset(parts[0])?;
        let hops = parts[1..]
            .chunks_exact(2)
            .map(|chunk| -> Result<Hop, RouteError> {
                Ok(Hop::new(chunk[0].parse()?, parse_asset(chunk[1])?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(input, hops)
    }
}

// ------------------
// | Encoded Routes |
// ------------------

/// A route encoded in execution order, for exact-input trades
///
/// `asset0, fee(0,1), asset1, ..., assetN`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Bytes", into = "Bytes")]
pub struct ForwardRoute(Bytes);

impl ForwardRoute {
    /// Wrap bytes already in forward order, validating their layout
    pub fn from_bytes(bytes: Bytes) -> Result<Self, RouteError> {
        decode_path(&bytes)?;
        Ok(Self(bytes))
    }

    /// The encoded bytes
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    /// Decode into a route in execution order
    pub fn decode(&self) -> Result<Route, RouteError> {
        decode_path(&self.0)
    }

    /// The asset the first hop consumes
    pub fn input_asset(&self) -> AssetId {
        first_asset(&self.0)
    }

    /// The asset the last hop yields
    pub fn output_asset(&self) -> AssetId {
        last_asset(&self.0)
    }
}

impl TryFrom<Bytes> for ForwardRoute {
    type Error = RouteError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<ForwardRoute> for Bytes {
    fn from(route: ForwardRoute) -> Self {
        route.0
    }
}

/// A route encoded from the desired output back to the input, for
/// exact-output trades
///
/// `assetN, fee(N-1,N), ..., asset1, fee(0,1), asset0`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Bytes", into = "Bytes")]
pub struct ReverseRoute(Bytes);

impl ReverseRoute {
    /// Wrap bytes already in reverse order, validating their layout
    pub fn from_bytes(bytes: Bytes) -> Result<Self, RouteError> {
        decode_path(&bytes)?;
        Ok(Self(bytes))
    }

    /// The encoded bytes
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    /// Decode into a route in execution order, i.e. undoing the reversal
    pub fn decode(&self) -> Result<Route, RouteError> {
        decode_path(&self.0).map(|route| route.reversed())
    }

    /// The asset the first executed hop consumes, encoded last
    pub fn input_asset(&self) -> AssetId {
        last_asset(&self.0)
    }

    /// The asset the last executed hop yields, encoded first
    pub fn output_asset(&self) -> AssetId {
        first_asset(&self.0)
    }
}

impl TryFrom<Bytes> for ReverseRoute {
    type Error = RouteError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<ReverseRoute> for Bytes {
    fn from(route: ReverseRoute) -> Self {
        route.0
    }
}

// ---------
// | Codec |
// ---------

/// Encode a route in the order its fields are given
///
/// The result has length `20 * (hops + 1) + 3 * hops`
pub fn encode_path(route: &Route) -> Bytes {
    let mut buf = Vec::with_capacity(ASSET_WIDTH + HOP_WIDTH * route.num_hops());
    buf.extend_from_slice(route.input.as_slice());
    for hop in route.hops.iter() {
        buf.extend_from_slice(&hop.fee.to_be_bytes());
        buf.extend_from_slice(hop.asset.as_slice());
    }

    Bytes::from(buf)
}

/// Decode route bytes in the order they are laid out, without interpreting
/// direction
pub fn decode_path(bytes: &[u8]) -> Result<Route, RouteError> {
    if bytes.len() == ASSET_WIDTH {
        return Err(RouteError::NoHops);
    }
    if bytes.len() < ASSET_WIDTH + HOP_WIDTH || (bytes.len() - ASSET_WIDTH) % HOP_WIDTH != 0 {
        return Err(RouteError::InvalidLength(bytes.len()));
    }

    let input = Address::from_slice(&bytes[..ASSET_WIDTH]);
    let hops = bytes[ASSET_WIDTH..]
        .chunks_exact(HOP_WIDTH)
        .map(|chunk| {
            let mut fee = [0u8; FEE_WIDTH];
            fee.copy_from_slice(&chunk[..FEE_WIDTH]);
            Hop::new(FeeTier::from_be_bytes(fee), Address::from_slice(&chunk[FEE_WIDTH..]))
        })
        .collect();

    Route::new(input, hops)
}

/// The first asset in a validated encoding
fn first_asset(bytes: &[u8]) -> AssetId {
    Address::from_slice(&bytes[..ASSET_WIDTH])
}

/// The last asset in a validated encoding
fn last_asset(bytes: &[u8]) -> AssetId {
    Address::from_slice(&bytes[bytes.len() - ASSET_WIDTH..])
}

#[cfg(test)]
mod test {
    use alloy_primitives::address;

    use super::*;

    /// Asset A
    const A: Address = address!("0x1111111111111111111111111111111111111111");
    /// Asset B
    const B: Address = address!("0x2222222222222222222222222222222222222222");
    /// Asset C
    const C: Address = address!("0x3333333333333333333333333333333333333333");

    /// The route A -[500]-> C -[3000]-> B
    fn two_hop_route() -> Route {
        Route::new(A, vec![Hop::new(FeeTier::LOW, C), Hop::new(FeeTier::MEDIUM, B)]).unwrap()
    }

    /// Tests route construction validation
    #[test]
    fn test_route_validation() {
        assert_eq!(Route::new(A, vec![]), Err(RouteError::NoHops));
        assert_eq!(Route::single(A, FeeTier::LOW, A), Err(RouteError::SameAssetHop(A)));

        let route = two_hop_route();
        assert_eq!(route.input_asset(), A);
        assert_eq!(route.output_asset(), B);
        assert_eq!(route.num_hops(), 2);
        assert_eq!(route.assets().collect_vec(), vec![A, C, B]);
    }

    /// Tests the per-hop pool triples
    #[test]
    fn test_route_pools() {
        let pools = two_hop_route().pools().collect_vec();
        assert_eq!(pools, vec![(A, FeeTier::LOW, C), (C, FeeTier::MEDIUM, B)]);
    }

    /// Tests the forward encoding layout
    #[test]
    fn test_forward_layout() {
        let route = two_hop_route();
        let encoded = route.forward();
        let bytes = encoded.as_bytes();

        assert_eq!(bytes.len(), ASSET_WIDTH * 3 + FEE_WIDTH * 2);
        assert_eq!(&bytes[..20], A.as_slice());
        assert_eq!(&bytes[20..23], &FeeTier::LOW.to_be_bytes());
        assert_eq!(&bytes[23..43], C.as_slice());
        assert_eq!(&bytes[43..46], &FeeTier::MEDIUM.to_be_bytes());
        assert_eq!(&bytes[46..], B.as_slice());

        assert_eq!(encoded.input_asset(), A);
        assert_eq!(encoded.output_asset(), B);
        assert_eq!(encoded.decode().unwrap(), route);
    }

    /// Tests that the reverse encoding lists the output asset first and
    /// decodes, in wire order, to the reverse of the execution order
    #[test]
    fn test_reverse_layout() {
        let route = two_hop_route();
        let encoded = route.reverse();
        let bytes = encoded.as_bytes();

        assert_eq!(&bytes[..20], B.as_slice());
        assert_eq!(&bytes[20..23], &FeeTier::MEDIUM.to_be_bytes());
        assert_eq!(&bytes[23..43], C.as_slice());
        assert_eq!(&bytes[43..46], &FeeTier::LOW.to_be_bytes());
        assert_eq!(&bytes[46..], A.as_slice());

        let wire_order = decode_path(bytes).unwrap();
        assert_eq!(wire_order.assets().collect_vec(), vec![B, C, A]);
        assert_eq!(wire_order, route.reversed());

        assert_eq!(encoded.input_asset(), A);
        assert_eq!(encoded.output_asset(), B);
        assert_eq!(encoded.decode().unwrap(), route);
    }

    /// Tests that forward and reverse encodings of a multi-hop route differ
    #[test]
    fn test_directions_differ() {
        let route = two_hop_route();
        assert_ne!(route.forward().as_bytes(), route.reverse().as_bytes());
        assert_eq!(route.reversed().reversed(), route);
    }

    /// Tests that malformed lengths are rejected
    #[test]
    fn test_decode_malformed() {
        let bytes = two_hop_route().forward().as_bytes().to_vec();

        assert_eq!(decode_path(&bytes[..20]), Err(RouteError::NoHops));
        assert_eq!(decode_path(&bytes[..19]), Err(RouteError::InvalidLength(19)));
        assert_eq!(decode_path(&bytes[..45]), Err(RouteError::InvalidLength(45)));
        assert_eq!(decode_path(&[]), Err(RouteError::InvalidLength(0)));
        assert!(ForwardRoute::from_bytes(Bytes::from(bytes[..44].to_vec())).is_err());
        assert!(ReverseRoute::from_bytes(Bytes::from(bytes)).is_ok());
    }

    /// Tests parsing a route from its string form
    #[test]
    fn test_route_from_str() {
        let s = format!("{A}:500:{C}:3000:{B}");
        assert_eq!(s.parse::<Route>().unwrap(), two_hop_route());

        assert!(matches!(format!("{A}:500").parse::<Route>(), Err(RouteError::InvalidFormat(_))));
        assert!(matches!(
            format!("{A}:500:0xnope").parse::<Route>(),
            Err(RouteError::InvalidAsset(_))
        ));
        assert!(matches!(
            format!("{A}:fee:{B}").parse::<Route>(),
            Err(RouteError::InvalidFeeTier(_))
        ));
    }

    /// Tests that deserializing an encoded route validates its layout
    #[test]
    fn test_encoded_route_serde() {
        let encoded = two_hop_route().forward();
        let json = serde_json::to_string(&encoded).unwrap();
        let decoded: ForwardRoute = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, encoded);

        assert!(serde_json::from_str::<ReverseRoute>("\"0x1234\"").is_err());
    }
}
