//! Pagination: splits line items into printed pages.
//!
//! The first page shares its space with the parties block, so it holds fewer
//! rows than the following pages:
//! - up to 8 items: one page
//! - 9 to 12 items: first 10, then the rest
//! - 13 to 24 items: first 16, then the rest
//! - more: first 16, then pages of 20, then the leftover if any
//!
//! The two-page shapes always yield two pages, even when the second one has
//! no rows (it carries the totals). An empty input yields one empty page.

const SINGLE_PAGE_MAX: usize = 8;
const SHORT_FIRST_PAGE_MAX: usize = 12;
const SHORT_FIRST_PAGE: usize = 10;
const FIRST_PAGE: usize = 16;
const TWO_PAGE_MAX: usize = 24;
const FOLLOWING_PAGE: usize = 20;

pub fn paginate<T>(items: &[T]) -> Vec<&[T]> {
    let count = items.len();

    if count <= SINGLE_PAGE_MAX {
        return vec![items];
    }
    if count <= SHORT_FIRST_PAGE_MAX {
        let first = SHORT_FIRST_PAGE.min(count);
        return vec![&items[..first], &items[first..]];
    }
    if count <= TWO_PAGE_MAX {
        let first = FIRST_PAGE.min(count);
        return vec![&items[..first], &items[first..]];
    }

    let (first, rest) = items.split_at(FIRST_PAGE);
    let mut pages = Vec::with_capacity(2 + rest.len() / FOLLOWING_PAGE);
    pages.push(first);
    pages.extend(rest.chunks(FOLLOWING_PAGE));
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(count: usize) -> Vec<usize> {
        let items: Vec<usize> = (0..count).collect();
        paginate(&items).iter().map(|p| p.len()).collect()
    }

    #[test]
    fn empty_input_is_one_empty_page() {
        assert_eq!(sizes(0), vec![0]);
    }

    #[test]
    fn page_boundaries() {
        assert_eq!(sizes(1), vec![1]);
        assert_eq!(sizes(8), vec![8]);
        assert_eq!(sizes(9), vec![9, 0]);
        assert_eq!(sizes(11), vec![10, 1]);
        assert_eq!(sizes(12), vec![10, 2]);
        assert_eq!(sizes(13), vec![13, 0]);
        assert_eq!(sizes(24), vec![16, 8]);
        assert_eq!(sizes(25), vec![16, 9]);
        assert_eq!(sizes(32), vec![16, 16]);
        assert_eq!(sizes(36), vec![16, 20]);
        assert_eq!(sizes(44), vec![16, 20, 8]);
        assert_eq!(sizes(56), vec![16, 20, 20]);
        assert_eq!(sizes(57), vec![16, 20, 20, 1]);
    }

    #[test]
    fn pages_preserve_order() {
        let items: Vec<usize> = (0..44).collect();
        let flat: Vec<usize> = paginate(&items).concat();
        assert_eq!(flat, items);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: pages partition the input, in order; past 24 items no
            /// page is empty and none but the first exceeds 20 rows.
            #[test]
            fn pages_partition_items(count in 0usize..200) {
                let items: Vec<usize> = (0..count).collect();
                let pages = paginate(&items);
                prop_assert_eq!(pages.concat(), items.clone());
                if count > TWO_PAGE_MAX {
                    prop_assert_eq!(pages[0].len(), FIRST_PAGE);
                    prop_assert!(pages.iter().all(|p| !p.is_empty()));
                    prop_assert!(pages[1..].iter().all(|p| p.len() <= FOLLOWING_PAGE));
                }
            }
        }
    }
}
