//! A price-indexed stock ledger built on two [`TwoThreeTree`] instances.
//!
//! A [`Ledger`] keeps every listed security in two trees at once: one keyed
//! by ticker for identity lookups, and one keyed by the composite
//! [`PriceKey`] (price, then ticker) for ordered price queries. Every
//! mutating operation re-keys the price index around the change, so the two
//! trees always agree. Price-range queries are answered with two
//! [`lower_bound`](TwoThreeTree::lower_bound) + [`rank`](TwoThreeTree::rank)
//! lookups and, for listings, a successor walk; they never mutate the trees.

use log::debug;
use thiserror::Error;

use crate::bounded::{BoundedOrd, OrderedF32};
use crate::two_three_tree::TwoThreeTree;

/// Errors reported by [`Ledger`] operations.
///
/// All validation happens before either tree is touched, so a returned error
/// means the ledger is unchanged.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LedgerError {
    /// A listing already exists under this ticker.
    #[error("ticker {0:?} is already listed")]
    AlreadyListed(String),
    /// No listing exists under this ticker.
    #[error("ticker {0:?} is not listed")]
    UnknownTicker(String),
    /// Tickers must be non-empty and must not start with `char::MAX`, which
    /// are reserved by the index bounds.
    #[error("invalid ticker {0:?}")]
    InvalidTicker(String),
    /// Listing prices must be finite and positive.
    #[error("invalid listing price {0}")]
    InvalidPrice(f32),
    /// Price deltas must be finite and nonzero.
    #[error("invalid price delta {0}")]
    InvalidDelta(f32),
    /// An event already exists at this timestamp.
    #[error("an event already exists at timestamp {0}")]
    DuplicateTimestamp(i64),
    /// No event exists at this timestamp.
    #[error("no event exists at timestamp {0}")]
    UnknownTimestamp(i64),
    /// The listing event carries the initial price and cannot be retracted.
    #[error("the listing event at timestamp {0} cannot be retracted")]
    ListingEvent(i64),
    /// The lower bound of a range query exceeds the upper bound.
    #[error("invalid price range: {lo} is not below {hi}")]
    InvalidRange {
        /// The offending lower bound.
        lo: f32,
        /// The offending upper bound.
        hi: f32,
    },
}

/// Composite key ordering listings by price, breaking ties by ticker.
///
/// # Examples
///
/// ```
/// use terntree::PriceKey;
///
/// let a = PriceKey::new(1.0, "A");
/// let b = PriceKey::new(1.0, "B");
/// let c = PriceKey::new(2.0, "A");
/// assert!(a < b && b < c);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PriceKey {
    price: OrderedF32,
    ticker: String,
}

impl PriceKey {
    /// Creates the key indexing `ticker` at `price`.
    #[must_use]
    pub fn new(price: f32, ticker: impl Into<String>) -> Self {
        Self {
            price: OrderedF32(price),
            ticker: ticker.into(),
        }
    }

    /// The price component.
    #[must_use]
    pub fn price(&self) -> f32 {
        self.price.0
    }

    /// The ticker component.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// A probe ordering below every real key at `price` and above every key
    /// at lower prices. No real key can equal it: the ledger rejects empty
    /// tickers.
    #[must_use]
    pub fn range_floor(price: f32) -> Self {
        Self {
            price: OrderedF32(price),
            ticker: String::new(),
        }
    }

    /// A probe ordering above every real key at `price` and below every key
    /// at higher prices.
    #[must_use]
    pub fn range_ceiling(price: f32) -> Self {
        Self {
            price: OrderedF32(price),
            ticker: char::MAX.to_string(),
        }
    }
}

impl BoundedOrd for PriceKey {
    fn min_bound() -> Self {
        Self {
            price: OrderedF32::min_bound(),
            ticker: String::min_bound(),
        }
    }

    fn max_bound() -> Self {
        Self {
            price: OrderedF32::max_bound(),
            ticker: String::max_bound(),
        }
    }
}

/// One listed security: its ticker, current price, and the event history
/// that produced that price.
///
/// The history is itself a [`TwoThreeTree`] keyed by timestamp; the listing
/// event is its first entry and holds the initial price. Applying an event
/// adds its delta to the current price, retracting one subtracts it back.
#[derive(Clone, Debug)]
pub struct Listing {
    ticker: String,
    price: f32,
    listed_at: i64,
    events: TwoThreeTree<i64, f32>,
}

impl Listing {
    fn new(ticker: String, price: f32, timestamp: i64) -> Self {
        let mut events = TwoThreeTree::new();
        events.insert(timestamp, price);
        Self {
            ticker,
            price,
            listed_at: timestamp,
            events,
        }
    }

    /// The listing's ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// The current price, i.e. the initial price plus every applied delta.
    #[must_use]
    pub fn price(&self) -> f32 {
        self.price
    }

    /// The timestamp of the listing event.
    #[must_use]
    pub fn listed_at(&self) -> i64 {
        self.listed_at
    }

    /// The number of events in the history, the listing event included.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// The delta recorded at `timestamp`, if any. The listing event reports
    /// the initial price.
    #[must_use]
    pub fn event(&self, timestamp: i64) -> Option<f32> {
        self.events.get(&timestamp).copied()
    }

    fn apply(&mut self, timestamp: i64, delta: f32) {
        debug_assert!(!self.events.contains_key(&timestamp));
        self.events.insert(timestamp, delta);
        self.price += delta;
    }

    fn retract(&mut self, timestamp: i64) {
        let delta = self
            .events
            .remove(&timestamp)
            .expect("`Listing::retract()` - timestamp was validated by the ledger!");
        self.price -= delta;
    }
}

/// A dual-indexed store of listings.
///
/// Identity queries go through the ticker tree; ordered price queries go
/// through the [`PriceKey`] tree. The two trees are kept consistent by
/// validating every operation up front and then updating both, so a failed
/// operation leaves the ledger untouched.
///
/// # Examples
///
/// ```
/// use terntree::Ledger;
///
/// let mut ledger = Ledger::new();
/// ledger.list("ACME", 1, 10.0).unwrap();
/// ledger.list("GLOBEX", 2, 25.0).unwrap();
/// ledger.list("INITECH", 3, 40.0).unwrap();
///
/// assert_eq!(ledger.count_in_range(5.0, 30.0).unwrap(), 2);
/// assert_eq!(
///     ledger.tickers_in_range(5.0, 30.0).unwrap(),
///     ["ACME", "GLOBEX"]
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    by_ticker: TwoThreeTree<String, Listing>,
    by_price: TwoThreeTree<PriceKey, String>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    /// Returns true if nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }

    /// Returns the listing under `ticker`, if any.
    #[must_use]
    pub fn listing(&self, ticker: &str) -> Option<&Listing> {
        self.by_ticker.get(ticker)
    }

    /// Returns the current price of `ticker`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownTicker`] if nothing is listed under `ticker`.
    pub fn price(&self, ticker: &str) -> Result<f32, LedgerError> {
        self.listing(ticker)
            .map(Listing::price)
            .ok_or_else(|| LedgerError::UnknownTicker(ticker.to_owned()))
    }

    /// Lists a new security at `price`, recording the listing event at
    /// `timestamp`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidPrice`] unless the price is finite and
    /// positive; [`LedgerError::InvalidTicker`] if the ticker is empty or
    /// starts with `char::MAX`; [`LedgerError::AlreadyListed`] if the ticker
    /// is taken.
    pub fn list(&mut self, ticker: impl Into<String>, timestamp: i64, price: f32) -> Result<(), LedgerError> {
        let ticker = ticker.into();
        if !price.is_finite() || price <= 0.0 {
            return Err(LedgerError::InvalidPrice(price));
        }
        // Empty tickers would collide with the ticker index's lower sentinel
        // bound, and char::MAX prefixes with the range-ceiling probes.
        if ticker.is_empty() || ticker.starts_with(char::MAX) {
            return Err(LedgerError::InvalidTicker(ticker));
        }
        if self.by_ticker.contains_key(&ticker) {
            return Err(LedgerError::AlreadyListed(ticker));
        }
        debug!("listing {ticker} at {price}");
        self.by_price.insert(PriceKey::new(price, ticker.clone()), ticker.clone());
        self.by_ticker
            .insert(ticker.clone(), Listing::new(ticker, price, timestamp));
        Ok(())
    }

    /// Removes the listing under `ticker` from both indexes and returns it.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownTicker`] if nothing is listed under `ticker`.
    pub fn delist(&mut self, ticker: &str) -> Result<Listing, LedgerError> {
        let listing = self
            .by_ticker
            .remove(ticker)
            .ok_or_else(|| LedgerError::UnknownTicker(ticker.to_owned()))?;
        self.by_price
            .remove(&PriceKey::new(listing.price(), listing.ticker()))
            .expect("`Ledger::delist()` - price index out of sync!");
        debug!("delisted {ticker}");
        Ok(listing)
    }

    /// Applies a price-change event to `ticker` and re-keys its entry in
    /// the price index.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidDelta`] unless the delta is finite and nonzero;
    /// [`LedgerError::UnknownTicker`] if the ticker is not listed;
    /// [`LedgerError::DuplicateTimestamp`] if an event already exists at
    /// `timestamp`.
    pub fn apply_event(&mut self, ticker: &str, timestamp: i64, delta: f32) -> Result<(), LedgerError> {
        if !delta.is_finite() || delta == 0.0 {
            return Err(LedgerError::InvalidDelta(delta));
        }
        let listing = self
            .by_ticker
            .get(ticker)
            .ok_or_else(|| LedgerError::UnknownTicker(ticker.to_owned()))?;
        if listing.event(timestamp).is_some() {
            return Err(LedgerError::DuplicateTimestamp(timestamp));
        }
        let old_price = listing.price();

        self.by_price
            .remove(&PriceKey::new(old_price, ticker))
            .expect("`Ledger::apply_event()` - price index out of sync!");
        let listing = self
            .by_ticker
            .get_mut(ticker)
            .expect("`Ledger::apply_event()` - listing vanished mid-update!");
        listing.apply(timestamp, delta);
        let new_price = listing.price();
        self.by_price
            .insert(PriceKey::new(new_price, ticker), ticker.to_owned());
        debug!("applied {delta} to {ticker} at {timestamp}: {old_price} -> {new_price}");
        Ok(())
    }

    /// Retracts the event at `timestamp` from `ticker`, reversing its delta
    /// and re-keying the price index.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownTicker`] if the ticker is not listed;
    /// [`LedgerError::ListingEvent`] if `timestamp` is the listing event;
    /// [`LedgerError::UnknownTimestamp`] if no event exists there.
    pub fn retract_event(&mut self, ticker: &str, timestamp: i64) -> Result<(), LedgerError> {
        let listing = self
            .by_ticker
            .get(ticker)
            .ok_or_else(|| LedgerError::UnknownTicker(ticker.to_owned()))?;
        if timestamp == listing.listed_at() {
            return Err(LedgerError::ListingEvent(timestamp));
        }
        if listing.event(timestamp).is_none() {
            return Err(LedgerError::UnknownTimestamp(timestamp));
        }
        let old_price = listing.price();

        self.by_price
            .remove(&PriceKey::new(old_price, ticker))
            .expect("`Ledger::retract_event()` - price index out of sync!");
        let listing = self
            .by_ticker
            .get_mut(ticker)
            .expect("`Ledger::retract_event()` - listing vanished mid-update!");
        listing.retract(timestamp);
        let new_price = listing.price();
        self.by_price
            .insert(PriceKey::new(new_price, ticker), ticker.to_owned());
        debug!("retracted event at {timestamp} from {ticker}: {old_price} -> {new_price}");
        Ok(())
    }

    /// Counts listings priced in `lo..=hi`.
    ///
    /// Two rank lookups, O(log n), no mutation: the probes built by
    /// [`PriceKey::range_floor`] and [`PriceKey::range_ceiling`] can never
    /// equal a real key, so the ranks of their lower bounds bracket exactly
    /// the listings in range.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidRange`] unless both bounds are finite and
    /// `lo <= hi`. An infinite bound would collide with the sentinel keys of
    /// the price index; use `f32::MIN`/`f32::MAX` to span everything.
    pub fn count_in_range(&self, lo: f32, hi: f32) -> Result<usize, LedgerError> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(LedgerError::InvalidRange { lo, hi });
        }
        let lower = self.by_price.lower_bound(&PriceKey::range_floor(lo));
        let upper = self.by_price.lower_bound(&PriceKey::range_ceiling(hi));
        Ok(self.by_price.rank(upper).0 - self.by_price.rank(lower).0)
    }

    /// Returns the tickers of the listings priced in `lo..=hi`, ascending
    /// by price and by ticker on ties.
    ///
    /// O(log n + k) for k results: one positioning search, then a successor
    /// walk along the leaf chain. No mutation.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidRange`] unless both bounds are finite and
    /// `lo <= hi`.
    pub fn tickers_in_range(&self, lo: f32, hi: f32) -> Result<Vec<String>, LedgerError> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(LedgerError::InvalidRange { lo, hi });
        }
        let ceiling = PriceKey::range_ceiling(hi);
        let mut tickers = Vec::new();
        let mut leaf = self.by_price.lower_bound(&PriceKey::range_floor(lo));
        // The max sentinel's key exceeds every ceiling, so the walk always
        // terminates without an explicit sentinel check.
        while *self.by_price.key(leaf) < ceiling {
            tickers.push(
                self.by_price
                    .value(leaf)
                    .expect("`Ledger::tickers_in_range()` - sentinel below the range ceiling!")
                    .clone(),
            );
            leaf = match self.by_price.successor(leaf) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(tickers)
    }
}
