use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;

use smallvec::SmallVec;

pub trait Action: Copy + Clone + Debug + Display + PartialEq + Eq {}
pub trait State: Copy + Clone + Debug + Display + PartialEq + Eq + Hash {}

/// Successors of a State, as `(Action, State)` pairs.
///
/// Grid-like spaces have at most 4 orthogonal neighbours, so this rarely
/// spills to the heap.
pub type Neighbours<St, A> = SmallVec<[(A, St); 4]>;

/// A path through a Space.
///
/// `steps` holds the `(Action, State)` pairs taken after leaving `start`, so
/// the last step (if any) lands on `end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path<St, A>
where
    St: State,
    A: Action,
{
    pub start: Option<St>,
    pub end: Option<St>,
    pub steps: Vec<(A, St)>,
}

impl<St, A> Path<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    pub fn new_from_start(start: St) -> Self {
        Self {
            start: Some(start),
            end: Some(start),
            steps: vec![],
        }
    }

    /// Builds a Path out of steps collected while walking back from `end`.
    pub fn from_reversed_steps(start: St, mut steps: Vec<(A, St)>) -> Self {
        steps.reverse();
        let end = steps.last().map_or(start, |(_a, s)| *s);
        Self {
            start: Some(start),
            end: Some(end),
            steps,
        }
    }

    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            start: None,
            end: None,
            steps: vec![],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[inline(always)]
    pub fn append(&mut self, step: (A, St)) {
        self.end = Some(step.1);
        self.steps.push(step);
    }

    /// The actions taken, in order.
    pub fn actions(&self) -> impl Iterator<Item = A> + '_ {
        self.steps.iter().map(|(a, _s)| *a)
    }

    /// The states visited after `start`, in order.
    pub fn cells(&self) -> impl Iterator<Item = St> + '_ {
        self.steps.iter().map(|(_a, s)| *s)
    }

    /// Runs sanity checks
    #[inline(always)]
    pub fn seems_valid(&self) -> bool {
        self.start.is_some() == self.end.is_some()
    }
}

impl<St, A> std::fmt::Display for Path<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        debug_assert!(self.seems_valid());

        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                write!(f, "Path({}, {start}:", self.len())?;
                for a in self.actions().take(20) {
                    write!(f, "{a}")?;
                }
                if self.len() > 20 {
                    write!(f, "…")?;
                }
                write!(f, ":{end})")
            }
            (None, None) => write!(f, "Path()"),
            _ => unreachable!("Path::start and Path::end should both be Some or None"),
        }
    }
}

pub trait Space<St, A>: Clone + std::fmt::Debug
where
    St: State,
    A: Action,
{
    /// Applies an action, returning the State it leads to if it's allowed.
    fn apply(&self, s: &St, a: &A) -> Option<St>;

    /// Expands a State.
    ///
    /// The order of the neighbours is part of the contract, as it defines the
    /// order in which uninformed searches discover states.
    fn neighbours(&self, s: &St) -> Neighbours<St, A>;

    /// Verify is a State is valid.
    fn valid(&self, s: &St) -> bool;

    fn valid_path(&self, p: &Path<St, A>) -> bool {
        if let Some(start) = p.start {
            if !self.valid(&start) {
                return false;
            }
            let mut state: St = start;
            for (a, s) in &p.steps {
                match self.apply(&state, a) {
                    Some(new_state) if new_state == *s => state = new_state,
                    _ => return false,
                }
            }
            p.end == Some(state)
        } else {
            // Empty paths are fine
            *p == Path::<St, A>::empty()
        }
    }

    fn size(&self) -> Option<usize> {
        None
    }
}
