/// A 1-based position in the leaf chain of a [`TwoThreeTree`].
///
/// Ranks count every leaf in ascending key order, including the permanent
/// minimum sentinel: the minimum sentinel has rank 1, the smallest real key
/// has rank 2, and so on. Callers interested in "how many keys lie between
/// two leaves" should subtract ranks, which cancels the sentinel offset.
///
/// # Examples
///
/// ```
/// use terntree::TwoThreeTree;
///
/// let mut tree = TwoThreeTree::new();
/// tree.insert(10, ());
/// tree.insert(20, ());
/// tree.insert(30, ());
///
/// let a = tree.search(&10).unwrap();
/// let b = tree.search(&20).unwrap();
/// assert_eq!(tree.rank(b).0 - tree.rank(a).0, 1);
/// ```
///
/// [`TwoThreeTree`]: crate::TwoThreeTree
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
