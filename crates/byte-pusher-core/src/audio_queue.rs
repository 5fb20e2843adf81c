use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Nominal rate of the machine's sample stream: 256 samples per frame at 60
/// frames per second.
pub const SAMPLE_RATE: u32 = 15_360;

/// Samples extracted at each frame boundary.
pub const SAMPLES_PER_FRAME: usize = 256;

/// Single-producer / single-consumer ring buffer of signed 8-bit samples.
///
/// Intended for the emulation thread (producer) feeding an audio callback
/// thread (consumer) without locks.
///
/// This queue is *lossy* when full: new pushes are dropped.
pub struct AudioProducer {
    inner: Arc<Inner>,
}

#[derive(Clone)]
pub struct AudioConsumer {
    inner: Arc<Inner>,
}

struct Inner {
    // One extra slot so head==tail is unambiguously empty.
    buf: Box<[UnsafeCell<i8>]>,
    cap: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// Safe because:
// - Only the producer writes to `buf[head]`.
// - Only the consumer reads from `buf[tail]`.
// - All coordination happens through atomics.
unsafe impl Sync for Inner {}

impl Inner {
    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            head - tail
        } else {
            (self.cap - tail) + head
        }
    }

    fn capacity_samples(&self) -> usize {
        self.cap.saturating_sub(1)
    }

    #[inline]
    fn next_index(&self, idx: usize) -> usize {
        let next = idx + 1;
        if next == self.cap { 0 } else { next }
    }
}

pub fn audio_queue(capacity_samples: usize) -> (AudioProducer, AudioConsumer) {
    let cap = capacity_samples.saturating_add(1).max(2);
    let mut v: Vec<UnsafeCell<i8>> = Vec::with_capacity(cap);
    for _ in 0..cap {
        v.push(UnsafeCell::new(0));
    }

    let inner = Arc::new(Inner {
        buf: v.into_boxed_slice(),
        cap,
        head: AtomicUsize::new(0),
        tail: AtomicUsize::new(0),
    });

    (
        AudioProducer {
            inner: Arc::clone(&inner),
        },
        AudioConsumer { inner },
    )
}

impl AudioProducer {
    #[inline]
    pub fn push(&self, sample: i8) -> bool {
        let head = self.inner.head.load(Ordering::Relaxed);
        let next = self.inner.next_index(head);
        let tail = self.inner.tail.load(Ordering::Acquire);
        if next == tail {
            // Full: drop newest.
            return false;
        }

        unsafe {
            *self.inner.buf[head].get() = sample;
        }
        self.inner.head.store(next, Ordering::Release);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity_samples(&self) -> usize {
        self.inner.capacity_samples()
    }
}

impl AudioConsumer {
    #[inline]
    pub fn pop(&self) -> Option<i8> {
        let tail = self.inner.tail.load(Ordering::Relaxed);
        let head = self.inner.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }

        let sample = unsafe { *self.inner.buf[tail].get() };
        let next = self.inner.next_index(tail);
        self.inner.tail.store(next, Ordering::Release);
        Some(sample)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity_samples(&self) -> usize {
        self.inner.capacity_samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let (producer, consumer) = audio_queue(8);
        for s in [-3i8, 0, 5, 127, -128] {
            assert!(producer.push(s));
        }
        assert_eq!(consumer.len(), 5);
        for s in [-3i8, 0, 5, 127, -128] {
            assert_eq!(consumer.pop(), Some(s));
        }
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn full_queue_drops_new_pushes() {
        let (producer, consumer) = audio_queue(2);
        assert!(producer.push(1));
        assert!(producer.push(2));
        assert!(!producer.push(3));
        assert_eq!(consumer.pop(), Some(1));
        assert!(producer.push(4));
        assert_eq!(consumer.pop(), Some(2));
        assert_eq!(consumer.pop(), Some(4));
    }

    #[test]
    fn wraps_around_many_times() {
        let (producer, consumer) = audio_queue(3);
        for round in 0..100i32 {
            assert!(producer.push(round as i8));
            assert_eq!(consumer.pop(), Some(round as i8));
        }
        assert!(consumer.is_empty());
    }
}
