//! Animation flags, animator features and animator states.

use crate::flags::flag_set;

flag_set! {
    /// Per-animation behavior flags.
    AnimationFlags {
        /// Keep the animation once it stops instead of requesting its removal.
        ///
        /// A kept animation can be played again later and its state and
        /// factor stay queryable.
        const KEEP_ONCE_PLAYED = 0;
    }
}

flag_set! {
    /// Attachment kinds an animator supports.
    AnimatorFeatures {
        /// Animations can be attached to nodes and get removed when the node goes away.
        const NODE_ATTACHMENT = 0;
        /// Animations can be attached to layer data and get removed when the data goes away.
        const DATA_ATTACHMENT = 1;
    }
}

flag_set! {
    /// Sticky animator state polled by the frame scheduler.
    AnimatorStates {
        /// Some animation is scheduled, playing or paused, or changed since
        /// the last advance. Keep calling advance while this is set.
        const NEEDS_ADVANCE = 0;
    }
}
