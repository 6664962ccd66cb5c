//! Batch of transitions.

/// Index-aligned transitions `(s_t, a_t, r_t, s_t+1, done_t)`.
///
/// Element `i` of every field describes the same transition. The fields must
/// have the same length; this is checked only in debug builds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionBatch {
    /// States `s_t`.
    pub state: Vec<Vec<f32>>,

    /// Actions `a_t`.
    pub action: Vec<Vec<f32>>,

    /// Rewards `r_t`.
    pub reward: Vec<f32>,

    /// Next states `s_t+1`.
    pub next_state: Vec<Vec<f32>>,

    /// Terminal flags.
    pub done: Vec<bool>,
}

impl TransitionBatch {
    /// Creates a batch from its fields.
    pub fn new(
        state: Vec<Vec<f32>>,
        action: Vec<Vec<f32>>,
        reward: Vec<f32>,
        next_state: Vec<Vec<f32>>,
        done: Vec<bool>,
    ) -> Self {
        let batch = Self {
            state,
            action,
            reward,
            next_state,
            done,
        };
        batch.debug_check_len();
        batch
    }

    /// Creates a batch from a sequence of single transitions.
    pub fn from_transitions<I>(transitions: I) -> Self
    where
        I: IntoIterator<Item = (Vec<f32>, Vec<f32>, f32, Vec<f32>, bool)>,
    {
        let mut batch = Self::default();
        for (s, a, r, s_next, done) in transitions {
            batch.state.push(s);
            batch.action.push(a);
            batch.reward.push(r);
            batch.next_state.push(s_next);
            batch.done.push(done);
        }
        batch
    }

    /// Returns the number of transitions.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch has no transitions.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Unpacks the data `(s_t, a_t, r_t, s_t+1, done_t)`.
    pub fn unpack(
        self,
    ) -> (
        Vec<Vec<f32>>,
        Vec<Vec<f32>>,
        Vec<f32>,
        Vec<Vec<f32>>,
        Vec<bool>,
    ) {
        (
            self.state,
            self.action,
            self.reward,
            self.next_state,
            self.done,
        )
    }

    fn debug_check_len(&self) {
        debug_assert_eq!(self.state.len(), self.reward.len());
        debug_assert_eq!(self.action.len(), self.reward.len());
        debug_assert_eq!(self.next_state.len(), self.reward.len());
        debug_assert_eq!(self.done.len(), self.reward.len());
    }
}
