use crate::Float;
use itertools::izip;

pub mod dynamics;
pub mod loading;
pub mod pusher;

// Run `$body` once for every attribute array of a particle store, with
// `$v` bound to a mutable reference to the array.
macro_rules! for_each_attr {
    ($p:expr, |$v:ident| $body:expr) => {{
        for $v in $p
            .position
            .iter_mut()
            .chain($p.position_old.iter_mut())
            .chain($p.momentum.iter_mut())
        {
            $body;
        }
        {
            let $v = &mut $p.weight;
            $body;
        }
        {
            let $v = &mut $p.charge;
            $body;
        }
        {
            let $v = &mut $p.id;
            $body;
        }
    }};
}

// Same as above, over matching arrays of a source and a destination store.
macro_rules! for_each_attr_pair {
    ($src:expr, $dst:expr, |$s:ident, $d:ident| $body:expr) => {{
        for ($s, $d) in $src
            .position
            .iter()
            .zip($dst.position.iter_mut())
            .chain($src.position_old.iter().zip($dst.position_old.iter_mut()))
            .chain($src.momentum.iter().zip($dst.momentum.iter_mut()))
        {
            $body;
        }
        {
            let ($s, $d) = (&$src.weight, &mut $dst.weight);
            $body;
        }
        {
            let ($s, $d) = (&$src.charge, &mut $dst.charge);
            $body;
        }
        {
            let ($s, $d) = (&$src.id, &mut $dst.id);
            $body;
        }
    }};
}

/// Structure-of-arrays storage for one species' macro-particles.
///
/// Row `i` of every attribute array describes the same particle; every
/// structural operation checks its indices before it mutates anything so
/// the arrays never fall out of lockstep.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Particles {
    n_dim: usize,
    pub(crate) position: Vec<Vec<Float>>,
    pub(crate) position_old: Vec<Vec<Float>>,
    // momentum is always three dimensional, in units of m c
    pub(crate) momentum: [Vec<Float>; 3],
    pub(crate) weight: Vec<Float>,
    // in units of the elementary charge
    pub(crate) charge: Vec<i16>,
    pub(crate) id: Vec<u64>,
}

impl Particles {
    pub fn new(n_dim: usize) -> Particles {
        Particles {
            n_dim,
            position: vec![Vec::new(); n_dim],
            position_old: vec![Vec::new(); n_dim],
            ..Default::default()
        }
    }

    /// Resize to `n_particles` rows of `n_dim` positions. Existing rows are
    /// kept, new rows are zeroed.
    pub fn initialize(&mut self, n_particles: usize, n_dim: usize) {
        if n_dim != self.n_dim {
            let n = self.size();
            self.n_dim = n_dim;
            self.position.resize(n_dim, vec![0.0; n]);
            self.position_old.resize(n_dim, vec![0.0; n]);
        }
        for_each_attr!(self, |v| v.resize(n_particles, Default::default()));
    }

    pub fn reserve(&mut self, n_particles: usize) {
        let extra = n_particles.saturating_sub(self.size());
        for_each_attr!(self, |v| v.reserve(extra));
    }

    pub fn clear(&mut self) {
        for_each_attr!(self, |v| v.clear());
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.weight.len()
    }

    pub fn capacity(&self) -> usize {
        self.weight.capacity()
    }

    pub fn dimension(&self) -> usize {
        self.n_dim
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    // Accessors

    #[inline(always)]
    pub fn position(&self, idim: usize, ipart: usize) -> Float {
        self.position[idim][ipart]
    }

    #[inline(always)]
    pub fn position_mut(&mut self, idim: usize, ipart: usize) -> &mut Float {
        &mut self.position[idim][ipart]
    }

    #[inline(always)]
    pub fn position_old(&self, idim: usize, ipart: usize) -> Float {
        self.position_old[idim][ipart]
    }

    #[inline(always)]
    pub fn position_old_mut(&mut self, idim: usize, ipart: usize) -> &mut Float {
        &mut self.position_old[idim][ipart]
    }

    #[inline(always)]
    pub fn momentum(&self, idim: usize, ipart: usize) -> Float {
        self.momentum[idim][ipart]
    }

    #[inline(always)]
    pub fn momentum_mut(&mut self, idim: usize, ipart: usize) -> &mut Float {
        &mut self.momentum[idim][ipart]
    }

    #[inline(always)]
    pub fn weight(&self, ipart: usize) -> Float {
        self.weight[ipart]
    }

    #[inline(always)]
    pub fn weight_mut(&mut self, ipart: usize) -> &mut Float {
        &mut self.weight[ipart]
    }

    #[inline(always)]
    pub fn charge(&self, ipart: usize) -> i16 {
        self.charge[ipart]
    }

    #[inline(always)]
    pub fn charge_mut(&mut self, ipart: usize) -> &mut i16 {
        &mut self.charge[ipart]
    }

    #[inline(always)]
    pub fn id(&self, ipart: usize) -> u64 {
        self.id[ipart]
    }

    #[inline(always)]
    pub fn id_mut(&mut self, ipart: usize) -> &mut u64 {
        &mut self.id[ipart]
    }

    pub fn positions(&self, idim: usize) -> &[Float] {
        &self.position[idim]
    }

    pub fn positions_old(&self, idim: usize) -> &[Float] {
        &self.position_old[idim]
    }

    pub fn momenta(&self, idim: usize) -> &[Float] {
        &self.momentum[idim]
    }

    pub fn weights(&self) -> &[Float] {
        &self.weight
    }

    pub fn charges(&self) -> &[i16] {
        &self.charge
    }

    pub fn ids(&self) -> &[u64] {
        &self.id
    }

    /// Lorentz factor from the stored momentum.
    #[inline(always)]
    pub fn lor_fac(&self, ipart: usize) -> Float {
        let px = self.momentum[0][ipart];
        let py = self.momentum[1][ipart];
        let pz = self.momentum[2][ipart];
        (1.0 + px * px + py * py + pz * pz).sqrt()
    }

    // Structural operations

    pub fn create_particle(&mut self) {
        self.create_particles(1);
    }

    pub fn create_particles(&mut self, n_additional: usize) {
        let n = self.size() + n_additional;
        for_each_attr!(self, |v| v.resize(n, Default::default()));
    }

    pub fn erase_particle(&mut self, ipart: usize) {
        self.erase_particles(ipart, 1);
    }

    pub fn erase_particles(&mut self, ipart: usize, n_part: usize) {
        assert!(
            ipart + n_part <= self.size(),
            "Cannot erase particles {}..{} of {}",
            ipart,
            ipart + n_part,
            self.size()
        );
        for_each_attr!(self, |v| {
            v.drain(ipart..ipart + n_part);
        });
    }

    /// Drop every particle from `ipart` to the end.
    pub fn erase_particle_trail(&mut self, ipart: usize) {
        assert!(ipart <= self.size());
        for_each_attr!(self, |v| v.truncate(ipart));
    }

    pub fn swap_part(&mut self, part1: usize, part2: usize) {
        self.swap_parts(part1, part2, 1);
    }

    /// Swap `n_part` consecutive rows starting at `part1` and `part2`,
    /// pairwise from the front.
    pub fn swap_parts(&mut self, part1: usize, part2: usize, n_part: usize) {
        assert!(part1 + n_part <= self.size() && part2 + n_part <= self.size());
        for_each_attr!(self, |v| {
            for k in 0..n_part {
                v.swap(part1 + k, part2 + k);
            }
        });
    }

    /// Copy row `src` over row `dst`.
    pub fn overwrite_part(&mut self, src: usize, dst: usize) {
        self.overwrite_parts(src, dst, 1);
    }

    pub fn overwrite_parts(&mut self, src: usize, dst: usize, n_part: usize) {
        assert!(src + n_part <= self.size() && dst + n_part <= self.size());
        for_each_attr!(self, |v| v.copy_within(src..src + n_part, dst));
    }

    pub fn overwrite_part_to(&self, src: usize, dest: &mut Particles, dst: usize) {
        self.overwrite_parts_to(src, dest, dst, 1);
    }

    pub fn overwrite_parts_to(&self, src: usize, dest: &mut Particles, dst: usize, n_part: usize) {
        assert_eq!(self.n_dim, dest.n_dim);
        assert!(src + n_part <= self.size() && dst + n_part <= dest.size());
        for_each_attr_pair!(self, dest, |s, d| d[dst..dst + n_part]
            .copy_from_slice(&s[src..src + n_part]));
    }

    /// Append row `ipart` to `dest`.
    pub fn cp_particle(&self, ipart: usize, dest: &mut Particles) {
        let at = dest.size();
        self.cp_particles(ipart, 1, dest, at);
    }

    /// Insert row `ipart` into `dest` before row `dest_id`.
    pub fn cp_particle_at(&self, ipart: usize, dest: &mut Particles, dest_id: usize) {
        self.cp_particles(ipart, 1, dest, dest_id);
    }

    pub fn cp_particles(&self, ipart: usize, n_part: usize, dest: &mut Particles, dest_id: usize) {
        assert_eq!(self.n_dim, dest.n_dim);
        assert!(ipart + n_part <= self.size() && dest_id <= dest.size());
        for_each_attr_pair!(self, dest, |s, d| {
            d.splice(dest_id..dest_id, s[ipart..ipart + n_part].iter().copied());
        });
    }

    /// Move row `ipart` to the end, shifting the following rows down.
    pub fn push_to_end(&mut self, ipart: usize) {
        assert!(ipart < self.size());
        for_each_attr!(self, |v| v[ipart..].rotate_left(1));
    }

    /// Reorder rows so that new row `k` is old row `order[k]`.
    pub(crate) fn permute(&mut self, order: &[usize]) {
        assert_eq!(order.len(), self.size());
        for_each_attr!(self, |v| {
            let permuted: Vec<_> = order.iter().map(|&k| v[k]).collect();
            *v = permuted;
        });
    }

    pub fn set_ids(&mut self) {
        for (i, id) in self.id.iter_mut().enumerate() {
            *id = i as u64 + 1;
        }
    }

    pub fn add_id_offsets(&mut self, offset: u64) {
        for id in self.id.iter_mut() {
            *id += offset;
        }
    }

    pub fn sort_by_id(&mut self) {
        let mut order: Vec<usize> = (0..self.size()).collect();
        order.sort_by_key(|&i| self.id[i]);
        self.permute(&order);
    }

    /// Squared displacement since the last snapshot.
    pub fn dist2(&self, ipart: usize) -> Float {
        izip!(&self.position, &self.position_old)
            .map(|(x, x_old)| (x[ipart] - x_old[ipart]).powi(2))
            .sum()
    }

    pub fn dist(&self, ipart: usize, idim: usize) -> Float {
        (self.position[idim][ipart] - self.position_old[idim][ipart]).abs()
    }

    /// Whether the particle lies in the half-open box `[min, max)`.
    pub fn is_part_in_domain(&self, ipart: usize, min: &[Float], max: &[Float]) -> bool {
        izip!(&self.position, min, max).all(|(x, &lo, &hi)| x[ipart] >= lo && x[ipart] < hi)
    }

    pub fn check_lockstep(&self) -> bool {
        let n = self.size();
        self.position.len() == self.n_dim
            && self.position_old.len() == self.n_dim
            && self
                .position
                .iter()
                .chain(self.position_old.iter())
                .chain(self.momentum.iter())
                .all(|v| v.len() == n)
            && self.charge.len() == n
            && self.id.len() == n
    }
}
