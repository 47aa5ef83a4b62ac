use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// A single-start, single-goal problem over a Space.
pub trait Problem<Sp, St, A>: std::fmt::Debug
where
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn space(&self) -> &Sp;
    fn start(&self) -> St;
    fn goal(&self) -> St;

    #[inline(always)]
    fn is_goal(&self, s: &St) -> bool {
        *s == self.goal()
    }
}
